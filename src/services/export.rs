//! CSV exports of transactions and members.

use chrono::NaiveDate;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::transactions::TransactionService;
use super::{Conditions, ServiceResult};
use crate::database::models::{Member, Transaction};
use crate::database::Repository;
use crate::filter::FilterData;
use crate::types::{EntryKind, MemberStatus};

const TRANSACTION_HEADER: [&str; 11] = [
    "id",
    "date",
    "kind",
    "category",
    "tithe",
    "member",
    "source",
    "amount",
    "payment_method",
    "reference",
    "description",
];

const MEMBER_HEADER: [&str; 11] = [
    "id",
    "last_name",
    "first_name",
    "document_id",
    "status",
    "gender",
    "birth_date",
    "phone",
    "email",
    "home_group",
    "membership_date",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionExportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberExportQuery {
    pub status: Option<MemberStatus>,
}

/// A rendered export and its checksum.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    pub filename: String,
    pub body: String,
    pub sha256: String,
}

impl CsvDocument {
    fn new(filename: impl Into<String>, body: String) -> Self {
        let sha256 = sha256_hex(body.as_bytes());
        Self { filename: filename.into(), body, sha256 }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Quotes a text field, doubling embedded quotes.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn optional(value: Option<&str>) -> String {
    value.map(quoted).unwrap_or_default()
}

fn push_row(out: &mut String, fields: &[String]) {
    out.push_str(&fields.join(","));
    out.push_str("\r\n");
}

fn header(columns: &[&str]) -> String {
    let mut out = String::new();
    push_row(&mut out, &columns.iter().map(|c| c.to_string()).collect::<Vec<_>>());
    out
}

pub fn transactions_csv(rows: &[Transaction]) -> String {
    let mut out = header(&TRANSACTION_HEADER);
    for t in rows {
        let source = t.bank_account_name.as_deref().or(t.petty_cash_name.as_deref());
        push_row(
            &mut out,
            &[
                t.id.to_string(),
                t.transaction_date.to_string(),
                t.kind.clone(),
                quoted(&t.category_name),
                t.is_tithe.to_string(),
                optional(t.member_name.as_deref()),
                optional(source),
                t.amount.to_string(),
                t.payment_method.clone(),
                optional(t.reference.as_deref()),
                optional(t.description.as_deref()),
            ],
        );
    }
    out
}

pub fn members_csv(rows: &[Member]) -> String {
    let mut out = header(&MEMBER_HEADER);
    for m in rows {
        push_row(
            &mut out,
            &[
                m.id.to_string(),
                quoted(&m.last_name),
                quoted(&m.first_name),
                optional(m.document_id.as_deref()),
                m.status.clone(),
                m.gender.clone().unwrap_or_default(),
                m.birth_date.map(|d| d.to_string()).unwrap_or_default(),
                optional(m.phone.as_deref()),
                optional(m.email.as_deref()),
                optional(m.home_group_name.as_deref()),
                m.membership_date.map(|d| d.to_string()).unwrap_or_default(),
            ],
        );
    }
    out
}

pub struct ExportService {
    pool: PgPool,
}

impl ExportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn transactions(&self, query: &TransactionExportQuery) -> ServiceResult<CsvDocument> {
        let conditions = Conditions::new()
            .eq("kind", query.kind.map(|k| k.as_str()))
            .range("transaction_date", query.from, query.to);
        let rows = TransactionService::new(self.pool.clone()).select_all(conditions).await?;
        Ok(CsvDocument::new("transactions.csv", transactions_csv(&rows)))
    }

    pub async fn members(&self, query: &MemberExportQuery) -> ServiceResult<CsvDocument> {
        let conditions = Conditions::new().eq("status", query.status.map(|s| s.as_str()));
        let filter = FilterData::conditions(conditions.into_map()).ordered("last_name asc, first_name asc");
        let rows = Repository::<Member>::new("member_details", self.pool.clone())
            .select_any(filter)
            .await?;
        Ok(CsvDocument::new("members.csv", members_csv(&rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn member(first: &str, last: &str) -> Member {
        Member {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: format!("{} {}", first, last),
            document_id: None,
            birth_date: Some("1985-03-02".parse().unwrap()),
            gender: Some("female".to_string()),
            phone: None,
            email: Some("ana@iglesia.org".to_string()),
            address: None,
            status: "active".to_string(),
            membership_date: None,
            baptism_date: None,
            home_group_id: None,
            home_group_name: Some("Hogar Norte".to_string()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn member_rows_are_quoted() {
        let csv = members_csv(&[member("Ana \"Anita\"", "Rojas, Díaz")]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], MEMBER_HEADER.join(","));
        assert_eq!(
            lines[1],
            "1,\"Rojas, Díaz\",\"Ana \"\"Anita\"\"\",,active,female,1985-03-02,,\"ana@iglesia.org\",\"Hogar Norte\","
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn transaction_source_prefers_account() {
        let t = Transaction {
            id: 7,
            kind: "expense".to_string(),
            category_id: 2,
            category_name: "Limpieza".to_string(),
            is_tithe: false,
            member_id: None,
            member_name: None,
            bank_account_id: None,
            bank_account_name: None,
            petty_cash_id: Some(1),
            petty_cash_name: Some("Caja chica".to_string()),
            amount: dec!(12.50),
            transaction_date: "2024-04-02".parse().unwrap(),
            payment_method: "cash".to_string(),
            reference: None,
            description: Some("Escobas".to_string()),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let csv = transactions_csv(&[t]);
        assert!(csv.ends_with("7,2024-04-02,expense,\"Limpieza\",false,,\"Caja chica\",12.50,cash,,\"Escobas\"\r\n"));
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(transactions_csv(&[]), format!("{}\r\n", TRANSACTION_HEADER.join(",")));
    }

    #[test]
    fn checksum_is_hex_sha256() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
