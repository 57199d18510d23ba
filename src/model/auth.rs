use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::common::Identity;
use crate::Config;

/// Header carrying the caller's wallet address.
pub const IDENTITY_HEADER: &str = "X-Wallet-Address";
/// Private cookie marking a session that has entered the admin code.
pub const ADMIN_COOKIE: &str = "authoring";
/// Identity recorded for code-authenticated admins without a wallet.
pub const ANONYMOUS_ADMIN: &str = "admin";

/// The caller's identity, if they sent a non-blank one.
fn identity_of(req: &Request<'_>) -> Option<Identity> {
    req.headers()
        .get_one(IDENTITY_HEADER)
        .map(str::trim)
        .filter(|identity| !identity.is_empty())
        .map(str::to_string)
}

/// A caller with a connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter(pub Identity);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Voter {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match identity_of(req) {
            Some(identity) => Outcome::Success(Voter(identity)),
            None => Outcome::Failure((
                Status::Unauthorized,
                Error::Status(
                    Status::Unauthorized,
                    format!("Missing {IDENTITY_HEADER} header"),
                ),
            )),
        }
    }
}

/// A caller permitted to create and modify elections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoringActor(pub Identity);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthoringActor {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return Outcome::Failure((
                Status::InternalServerError,
                Error::Status(
                    Status::InternalServerError,
                    "Application config not loaded".to_string(),
                ),
            ));
        };
        let identity = identity_of(req);

        // A known admin wallet needs no login.
        if let Some(identity) = identity.as_deref() {
            if config.is_admin_identity(identity) {
                return Outcome::Success(AuthoringActor(identity.to_string()));
            }
        }

        // Otherwise they must have entered the admin code.
        match req.cookies().get_private(ADMIN_COOKIE) {
            Some(cookie) => Outcome::Success(AuthoringActor(
                identity.unwrap_or_else(|| cookie.value().to_string()),
            )),
            None => Outcome::Failure((
                Status::Unauthorized,
                Error::Status(
                    Status::Unauthorized,
                    "Authoring requires an admin identity or the admin code".to_string(),
                ),
            )),
        }
    }
}

/// Admin-code login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLogin {
    pub code: String,
    /// Recorded as the author of elections created in this session.
    #[serde(default)]
    pub identity: Option<Identity>,
}

impl AdminLogin {
    /// The session cookie for a successful login.
    pub fn into_cookie(self) -> Cookie<'static> {
        let identity = self
            .identity
            .map(|identity| identity.trim().to_string())
            .filter(|identity| !identity.is_empty())
            .unwrap_or_else(|| ANONYMOUS_ADMIN.to_string());
        Cookie::build(ADMIN_COOKIE, identity)
            .same_site(SameSite::Strict)
            .http_only(true)
            .finish()
    }
}
