use axum::{
    Extension, Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use shared::{
    domain::{Identity, Role},
    errors::ErrorResponse,
};

fn require(
    identity: Identity,
    role: Role,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if identity.is(role) {
        return Ok(());
    }

    Err((
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::fail(format!(
            "Access denied. Required role: {role}"
        ))),
    ))
}

pub async fn buyer_only(
    Extension(identity): Extension<Identity>,
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    require(identity, Role::Buyer)?;
    Ok(next.run(req).await)
}

pub async fn admin_only(
    Extension(identity): Extension<Identity>,
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    require(identity, Role::Admin)?;
    Ok(next.run(req).await)
}
