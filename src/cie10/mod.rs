//! CIE-10 (ICD-10) diagnosis codes: lookup for the history forms and the
//! bulk CSV import.

pub mod chapter;
mod requests;
mod responses;

use crate::{
    account::utils::get_account_id_from_token,
    config::AppConfig,
    database::{block, get_db_conn},
    models::cie10::{Cie10, NewCie10},
    upload::MultipartForm,
    DbPool,
};
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{self, bail, Context};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use std::collections::HashSet;

use self::{requests::*, responses::*};

pub const SEARCH_LIMIT: i64 = 50;
pub const MIN_QUERY_LEN: usize = 2;
const INSERT_CHUNK: usize = 500;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_cie10).service(import_cie10);
}

crate::post_funcs! {
    (search_cie10, "/search", SearchCie10Request, SearchCie10Response),
}

crate::multipart_funcs! {
    (import_cie10, "/import", ImportCie10Response),
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `(prefix, contains)` LIKE patterns, or `None` when the query is too
/// short to search.
fn search_patterns(q: &str) -> Option<(String, String)> {
    let q = q.trim();
    if q.chars().count() < MIN_QUERY_LEN {
        return None;
    }
    let q = escape_like(q);
    Some((format!("{}%", q), format!("%{}%", q)))
}

fn cie10_item(c: Cie10) -> Cie10Item {
    Cie10Item {
        id: c.id,
        text: format!("{} - {}", c.code, c.description),
        code: c.code,
        description: c.description,
    }
}

async fn search_cie10_impl(
    pool: web::Data<DbPool>,
    info: web::Json<SearchCie10Request>,
) -> anyhow::Result<SearchCie10Response> {
    use crate::schema::cie10;

    let info = info.into_inner();
    get_account_id_from_token(info.login_token, &pool).await?;

    let (prefix, contains) = match search_patterns(&info.q.unwrap_or_default()) {
        Some(patterns) => patterns,
        None => {
            return Ok(SearchCie10Response {
                success: true,
                err: "".to_string(),
                results: vec![],
            })
        }
    };

    let conn = get_db_conn(&pool)?;
    let rows = block(move || {
        let mut rows = cie10::table
            .filter(cie10::active.eq(true))
            .filter(cie10::code.like(&prefix))
            .order(cie10::code.asc())
            .limit(SEARCH_LIMIT)
            .get_results::<Cie10>(&conn)
            .context("DB error")?;

        let remaining = SEARCH_LIMIT - rows.len() as i64;
        if remaining > 0 {
            let more = cie10::table
                .filter(cie10::active.eq(true))
                .filter(cie10::code.not_like(&prefix))
                .filter(
                    cie10::code
                        .like(&contains)
                        .or(cie10::description.like(&contains)),
                )
                .order(cie10::code.asc())
                .limit(remaining)
                .get_results::<Cie10>(&conn)
                .context("DB error")?;
            rows.extend(more);
        }
        Ok(rows)
    })
    .await?;

    Ok(SearchCie10Response {
        success: true,
        err: "".to_string(),
        results: rows.into_iter().map(cie10_item).collect(),
    })
}

/// Codes start with a letter followed by a digit; anything else is a header
/// or a blank line.
fn looks_like_code(code: &str) -> bool {
    let mut chars = code.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_ascii_alphabetic() && b.is_ascii_digit()
    )
}

/// Parses `short_code, short_description, code, description` rows into new
/// records, skipping malformed rows and codes already in `known`. Returns the
/// records and the number of skipped rows.
fn parse_cie10_csv(
    data: &[u8],
    known: &mut HashSet<String>,
    now: NaiveDateTime,
) -> anyhow::Result<(Vec<NewCie10>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = vec![];
    let mut skipped = 0;
    for row in reader.records() {
        let row = row.context("Invalid CSV file")?;
        if row.len() < 4 {
            skipped += 1;
            continue;
        }
        let group = row[1].trim();
        let code = row[2].trim();
        if code.is_empty() || !looks_like_code(code) || known.contains(code) {
            skipped += 1;
            continue;
        }

        known.insert(code.to_string());
        records.push(NewCie10 {
            code: code.to_string(),
            description: row[3].trim().trim_matches('"').trim().to_string(),
            chapter: Some(chapter::chapter_of(code).to_string()),
            group_name: if group.is_empty() {
                None
            } else {
                Some(group.to_string())
            },
            active: true,
            updated_at: now,
        });
    }
    Ok((records, skipped))
}

async fn import_cie10_impl(
    pool: web::Data<DbPool>,
    _config: web::Data<AppConfig>,
    payload: Multipart,
) -> anyhow::Result<ImportCie10Response> {
    use crate::schema::cie10;

    let mut form = MultipartForm::read(payload).await?;
    let token = form.field("login_token").unwrap_or_default();
    get_account_id_from_token(token, &pool).await?;

    let file = match form.take_file("file") {
        Some(file) => file,
        None => bail!("No CSV file was selected"),
    };
    if !file.filename.to_lowercase().ends_with(".csv") {
        bail!("The import file must be a .csv file");
    }

    let conn = get_db_conn(&pool)?;
    let (inserted, skipped) = block(move || {
        let mut known: HashSet<String> = cie10::table
            .select(cie10::code)
            .get_results::<String>(&conn)
            .context("DB error")?
            .into_iter()
            .collect();
        let (records, skipped) = parse_cie10_csv(&file.bytes, &mut known, Utc::now().naive_utc())?;

        conn.transaction(|| {
            for chunk in records.chunks(INSERT_CHUNK) {
                diesel::insert_into(cie10::table)
                    .values(chunk)
                    .execute(&conn)
                    .context("DB error")?;
            }
            Ok::<(), anyhow::Error>(())
        })?;
        Ok((records.len(), skipped))
    })
    .await?;

    log::info!("CIE-10 import: {} inserted, {} skipped", inserted, skipped);

    Ok(ImportCie10Response {
        success: true,
        err: "".to_string(),
        inserted,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd(2025, 1, 1).and_hms(0, 0, 0)
    }

    #[test]
    fn short_queries_do_not_search() {
        assert_eq!(search_patterns(""), None);
        assert_eq!(search_patterns(" a "), None);
        assert_eq!(
            search_patterns(" j0 "),
            Some(("j0%".to_string(), "%j0%".to_string()))
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("10%_a"), "10\\%\\_a");
        assert_eq!(
            search_patterns("a_"),
            Some(("a\\_%".to_string(), "%a\\_%".to_string()))
        );
    }

    #[test]
    fn items_carry_display_text() {
        let item = cie10_item(Cie10 {
            id: 4,
            code: "J00X".to_string(),
            description: "Rinofaringitis aguda".to_string(),
            chapter: None,
            group_name: None,
            active: true,
            updated_at: now(),
        });
        assert_eq!(item.text, "J00X - Rinofaringitis aguda");
        assert_eq!(item.code, "J00X");
    }

    #[test]
    fn csv_rows_are_parsed_and_filtered() {
        let data = "codigo3,descripcion3,codigo4,descripcion4\n\
            A00,COLERA,A000,\"COLERA DEBIDO A VIBRIO CHOLERAE 01\"\n\
            A00,COLERA,A001,COLERA NO ESPECIFICADO\n\
            A00,COLERA,A001,REPETIDO\n\
            A01,FIEBRES,,SIN CODIGO\n\
            A02,CORTA\n\
            J00,RINOFARINGITIS,J00X,RINOFARINGITIS AGUDA\n";
        let mut known: HashSet<String> = ["J00X".to_string()].iter().cloned().collect();

        let (records, skipped) = parse_cie10_csv(data.as_bytes(), &mut known, now()).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["A000", "A001"]);
        assert_eq!(skipped, 5);

        assert_eq!(records[0].description, "COLERA DEBIDO A VIBRIO CHOLERAE 01");
        assert_eq!(records[0].group_name.as_deref(), Some("COLERA"));
        assert!(records[0]
            .chapter
            .as_deref()
            .unwrap_or("")
            .starts_with("I."));
        assert!(records.iter().all(|r| r.active));
        assert!(known.contains("A001"));
    }

    #[test]
    fn code_shape() {
        assert!(looks_like_code("A000"));
        assert!(!looks_like_code("codigo4"));
        assert!(!looks_like_code("A"));
    }
}
