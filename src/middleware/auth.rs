//! Authentication middleware
//!
//! Resolves the logged-in staff member from the session and attaches the
//! database of the branch company they logged into.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;
use tower_sessions::Session;

use crate::entity::authority::{self, UserType};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Session key for the logged-in staff member
pub const SESSION_USER_KEY: &str = "user";

/// Branch database connection for use in handlers via Extension
#[derive(Clone)]
pub struct DbConn(pub Arc<DatabaseConnection>);

impl Deref for DbConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DatabaseConnection> for DbConn {
    fn from(db: DatabaseConnection) -> Self {
        Self(Arc::new(db))
    }
}

/// What login stores in the session
///
/// The user type is not kept here, it is read again on every request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub staff_id: String,
    pub branch_id: String,
}

/// Extension to store current user in request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub staff_id: String,
    pub user_type: UserType,
    pub branch_id: String,
}

impl CurrentUser {
    /// Check if the user may modify shared records
    pub fn is_manager(&self) -> bool {
        self.user_type.is_manager()
    }

    /// Reject non-manager users
    pub fn require_manager(&self) -> AppResult<()> {
        if self.is_manager() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "user type {} cannot perform this operation",
                self.user_type
            )))
        }
    }

    /// Managers see everyone, normal staff only themselves
    pub fn can_view_staff(&self, staff_id: &str) -> bool {
        self.is_manager() || self.staff_id == staff_id
    }

    /// Reject access to another staff member's records
    pub fn require_staff_access(&self, staff_id: &str) -> AppResult<()> {
        if self.can_view_staff(staff_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("cannot access another staff member's records".to_string()))
        }
    }
}

/// Load the session user, if any
pub async fn session_user(session: &Session) -> AppResult<Option<SessionUser>> {
    Ok(session.get::<SessionUser>(SESSION_USER_KEY).await?)
}

/// Resolve the session user against the branch's authority table
///
/// Returns `None` once the account's authority row is gone.
pub async fn load_current_user(
    db: &DatabaseConnection,
    session_user: SessionUser,
) -> AppResult<Option<CurrentUser>> {
    let Some(row) = authority::Entity::find()
        .filter(authority::Column::StaffId.eq(&session_user.staff_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let user_type = UserType::parse(&row.user_type).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown user type '{}' for {}, treating as normal",
            row.user_type,
            row.staff_id
        );
        UserType::Normal
    });

    Ok(Some(CurrentUser {
        staff_id: session_user.staff_id,
        user_type,
        branch_id: session_user.branch_id,
    }))
}

/// Authentication middleware for routes that need a login
pub async fn auth_layer(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match session_user(&session).await {
        Ok(Some(user)) => user,
        Ok(None) => return AppError::Unauthorized.into_response(),
        Err(e) => return e.into_response(),
    };

    let Some(db) = state.branch_db(&user.branch_id) else {
        tracing::warn!(
            "Session of {} refers to unknown branch {}",
            user.staff_id,
            user.branch_id
        );
        return AppError::Unauthorized.into_response();
    };

    let staff_id = user.staff_id.clone();
    let current = match load_current_user(&db, user).await {
        Ok(Some(current)) => current,
        Ok(None) => {
            tracing::warn!("Account {} no longer exists, session rejected", staff_id);
            return AppError::Unauthorized.into_response();
        }
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(DbConn(db));
    request.extensions_mut().insert(current);

    next.run(request).await
}
