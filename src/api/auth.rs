use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::auth::{AdminLogin, ADMIN_COOKIE},
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![admin_login, logout]
}

/// Unlock authoring for this session with the admin code.
#[post("/auth/admin", data = "<login>", format = "json")]
pub async fn admin_login(
    cookies: &CookieJar<'_>,
    login: Json<AdminLogin>,
    config: &State<Config>,
) -> Result<()> {
    if !config.admin_code_matches(&login.code) {
        return Err(Error::Status(
            Status::Unauthorized,
            "Incorrect admin code".to_string(),
        ));
    }

    let cookie = login.into_inner().into_cookie();
    info!("Admin session opened for {}", cookie.value());
    cookies.add_private(cookie);
    Ok(())
}

#[post("/auth/logout")]
pub async fn logout(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::named(ADMIN_COOKIE));
}
