use axum::{
    extract::Query,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Extension,
};

use crate::auth::roles::{check_permission, ROLES_FINANCE_READ, ROLES_MEMBERSHIP_READ};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::export::{CsvDocument, ExportService, MemberExportQuery, TransactionExportQuery};

const CHECKSUM_HEADER: HeaderName = HeaderName::from_static("x-content-sha256");

fn csv_response(document: CsvDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.filename),
            ),
            (CHECKSUM_HEADER, document.sha256),
        ],
        document.body,
    )
        .into_response()
}

/// GET /api/export/transactions.csv?from=&to=&kind=
pub async fn transactions(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TransactionExportQuery>,
) -> Result<Response, ApiError> {
    check_permission(&auth, ROLES_FINANCE_READ)?;

    let pool = DatabaseManager::pool()?;
    let document = ExportService::new(pool).transactions(&query).await?;

    tracing::info!(user = %auth.email, bytes = document.body.len(), "transactions exported");
    Ok(csv_response(document))
}

/// GET /api/export/members.csv?status=
pub async fn members(
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MemberExportQuery>,
) -> Result<Response, ApiError> {
    check_permission(&auth, ROLES_MEMBERSHIP_READ)?;

    let pool = DatabaseManager::pool()?;
    let document = ExportService::new(pool).members(&query).await?;

    tracing::info!(user = %auth.email, bytes = document.body.len(), "members exported");
    Ok(csv_response(document))
}
