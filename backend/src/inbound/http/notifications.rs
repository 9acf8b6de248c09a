//! Notification feed HTTP handlers.
//!
//! ```text
//! GET  /api/v1/notifications
//! GET  /api/v1/notifications/unread-count
//! POST /api/v1/notifications/{id}/read
//! POST /api/v1/notifications/read-all
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{
    ListNotificationsRequest, MarkAllNotificationsReadRequest, MarkNotificationReadRequest,
    NotificationPayload, UnreadCountRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Response payload carrying the caller's notifications, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponseBody {
    pub notifications: Vec<NotificationPayload>,
}

/// Response payload carrying the caller's unread count.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponseBody {
    pub unread: u64,
}

/// Response payload carrying how many notifications were newly marked read.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponseBody {
    pub marked: u64,
}

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notification feed", body = NotificationListResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("SessionCookie" = []))
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<NotificationListResponseBody>> {
    let caller = session.require_caller()?;
    let response = state
        .notifications
        .list_notifications(ListNotificationsRequest { caller })
        .await?;
    Ok(web::Json(NotificationListResponseBody {
        notifications: response.notifications,
    }))
}

/// Count the caller's unread notifications.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount",
    security(("SessionCookie" = []))
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UnreadCountResponseBody>> {
    let caller = session.require_caller()?;
    let response = state
        .notifications
        .unread_count(UnreadCountRequest { caller })
        .await?;
    Ok(web::Json(UnreadCountResponseBody {
        unread: response.unread,
    }))
}

/// Mark one of the caller's notifications as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = uuid::Uuid, Path, description = "Notification identifier")),
    responses(
        (status = 204, description = "Notification marked read"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead",
    security(("SessionCookie" = []))
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<actix_web::HttpResponse> {
    let caller = session.require_caller()?;
    let notification_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state
        .notifications
        .mark_read(MarkNotificationReadRequest {
            caller,
            notification_id,
        })
        .await?;
    Ok(actix_web::HttpResponse::NoContent().finish())
}

/// Mark every unread notification of the caller as read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Unread notifications marked read", body = MarkAllReadResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead",
    security(("SessionCookie" = []))
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarkAllReadResponseBody>> {
    let caller = session.require_caller()?;
    let response = state
        .notifications
        .mark_all_read(MarkAllNotificationsReadRequest { caller })
        .await?;
    Ok(web::Json(MarkAllReadResponseBody {
        marked: response.marked,
    }))
}
