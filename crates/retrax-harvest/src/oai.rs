//! OAI-PMH `ListRecords` response parsing using quick-xml.
//!
//! Two response shapes matter:
//!
//! - A regular page: `<record>` elements carrying `arXivRaw` metadata
//!   (`<id>` plus `<version version="vN">` children with `<date>` and
//!   `<size>`), followed by an optional `<resumptionToken>`.
//! - A flow-control refusal: no records, just an `<h1>` whose text embeds
//!   the number of seconds to wait (e.g. "Retry after 30 seconds").
//!
//! The resumption token is an opaque server-issued cursor and is passed
//! through unchanged, never inspected.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::HarvestError;
use crate::fetcher::PageOutcome;
use crate::record::{RawRecord, VersionEntry};

/// Parse a `ListRecords` response body into a page or a rate-limit signal.
pub fn parse_response(body: &str) -> Result<PageOutcome, HarvestError> {
    if let Some(wait) = parse_retry_notice(body) {
        return wait.map(|retry_after_secs| PageOutcome::RateLimited { retry_after_secs });
    }
    parse_list_records(body)
}

/// Detect a flow-control notice: an `<h1>` element in the body.
///
/// Returns `None` when the body has no `<h1>`; `Some(Err(..))` when the
/// notice carries no parseable wait time (a malformed wait is a protocol
/// error, never treated as zero).
pub fn parse_retry_notice(body: &str) -> Option<Result<u64, HarvestError>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"h1" => {
                let text = match reader.read_text(e.name()) {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::new(),
                };
                return Some(extract_wait_seconds(&text).ok_or_else(|| {
                    HarvestError::protocol(format!(
                        "flow-control notice without a usable wait time: {text:?}"
                    ))
                }));
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// First run of ASCII digits in the notice text, parsed as seconds.
fn extract_wait_seconds(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Parse a regular `ListRecords` page.
pub fn parse_list_records(body: &str) -> Result<PageOutcome, HarvestError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut next_token: Option<String> = None;
    let mut saw_record_element = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"error" => {
                let code = attribute(&e, b"code").unwrap_or_default();
                let text = read_text(&mut reader, &e)?;
                return Err(HarvestError::protocol(format!(
                    "OAI error [{code}]: {text}"
                )));
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"record" => {
                saw_record_element = true;
                match parse_record(&mut reader)? {
                    Some(record) => records.push(record),
                    // header-only entry (e.g. deleted record), nothing to keep
                    None => log::debug!("skipping record without arXivRaw metadata"),
                }
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"resumptionToken" => {
                let token = read_text(&mut reader, &e)?;
                if !token.is_empty() {
                    next_token = Some(token);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::protocol(format!("malformed XML: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_record_element && next_token.is_none() {
        return Err(HarvestError::protocol(
            "response carried neither records, a token, nor a flow-control notice",
        ));
    }

    Ok(PageOutcome::Page {
        records,
        next_token,
    })
}

/// Parse one `<record>` element. Returns `None` for entries without
/// `arXivRaw` content (the header alone identifies deleted records).
fn parse_record(reader: &mut Reader<&[u8]>) -> Result<Option<RawRecord>, HarvestError> {
    let mut id = String::new();
    let mut versions = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"id" => id = read_text(reader, &e)?,
                b"version" => {
                    let label = attribute(&e, b"version").unwrap_or_default();
                    versions.push(parse_version(reader, label)?);
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"record" => break,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::protocol(format!("malformed record XML: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    if id.is_empty() {
        return Ok(None);
    }
    Ok(Some(RawRecord { id, versions }))
}

/// Parse one `<version version="vN">` element body.
fn parse_version(
    reader: &mut Reader<&[u8]>,
    label: String,
) -> Result<VersionEntry, HarvestError> {
    let mut date = String::new();
    let mut size = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"date" => date = read_text(reader, &e)?,
                b"size" => size = read_text(reader, &e)?,
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"version" => break,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HarvestError::protocol(format!(
                    "malformed version XML: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(VersionEntry {
        version: label,
        date,
        size,
    })
}

fn read_text(
    reader: &mut Reader<&[u8]>,
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<String, HarvestError> {
    reader
        .read_text(e.name())
        .map(|t| t.trim().to_string())
        .map_err(|err| HarvestError::protocol(format!("malformed XML text: {err}")))
}

fn attribute(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2012-06-01T12:00:00Z</responseDate>
  <ListRecords>
    <record>
      <header>
        <identifier>oai:arXiv.org:cs/0101001</identifier>
        <datestamp>2001-01-15</datestamp>
        <setSpec>cs</setSpec>
      </header>
      <metadata>
        <arXivRaw xmlns="http://arxiv.org/OAI/arXivRaw/">
          <id>cs/0101001</id>
          <submitter>A. Author</submitter>
          <version version="v1">
            <date>Mon, 1 Jan 2001 10:00:00 GMT</date>
            <size>5kb</size>
            <source_type>D</source_type>
          </version>
          <version version="v2">
            <date>Wed, 10 Jan 2001 10:00:00 GMT</date>
            <size>0kb</size>
            <source_type>I</source_type>
          </version>
        </arXivRaw>
      </metadata>
    </record>
    <record>
      <header>
        <identifier>oai:arXiv.org:cs/0101002</identifier>
        <datestamp>2001-01-20</datestamp>
      </header>
      <metadata>
        <arXivRaw xmlns="http://arxiv.org/OAI/arXivRaw/">
          <id>cs/0101002</id>
          <version version="v1">
            <date>Fri, 5 Jan 2001 08:30:00 GMT</date>
            <size>12kb</size>
          </version>
        </arXivRaw>
      </metadata>
    </record>
    <resumptionToken cursor="0" completeListSize="42">1234|5678</resumptionToken>
  </ListRecords>
</OAI-PMH>"#;

    #[test]
    fn parses_page_with_token() {
        let outcome = parse_response(PAGE).unwrap();
        let PageOutcome::Page {
            records,
            next_token,
        } = outcome
        else {
            panic!("expected a page");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(next_token.as_deref(), Some("1234|5678"));

        let first = &records[0];
        assert_eq!(first.id, "cs/0101001");
        assert_eq!(first.versions.len(), 2);
        assert_eq!(first.versions[0].version, "v1");
        assert_eq!(first.versions[0].date, "Mon, 1 Jan 2001 10:00:00 GMT");
        assert_eq!(first.versions[0].size, "5kb");
        assert_eq!(first.versions[1].size, "0kb");
    }

    #[test]
    fn final_page_has_no_token() {
        // same page, empty resumptionToken element
        let body = PAGE.replace("1234|5678", "");
        let outcome = parse_response(&body).unwrap();
        let PageOutcome::Page { next_token, .. } = outcome else {
            panic!("expected a page");
        };
        assert!(next_token.is_none());
    }

    #[test]
    fn rate_limit_notice() {
        let body = "<html><body><h1>Retry after 30 seconds</h1></body></html>";
        let outcome = parse_response(body).unwrap();
        assert!(matches!(
            outcome,
            PageOutcome::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[test]
    fn rate_limit_notice_free_text() {
        let body = "<html><body><h1>please wait 30 seconds</h1></body></html>";
        let outcome = parse_response(body).unwrap();
        assert!(matches!(
            outcome,
            PageOutcome::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[test]
    fn rate_limit_notice_without_number_is_protocol_error() {
        let body = "<html><body><h1>Retry later</h1></body></html>";
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, HarvestError::Protocol { .. }));
    }

    #[test]
    fn oai_error_element_is_protocol_error() {
        let body = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
          <error code="badResumptionToken">The token has expired</error>
        </OAI-PMH>"#;
        let err = parse_response(body).unwrap_err();
        let HarvestError::Protocol { detail } = err else {
            panic!("expected protocol error");
        };
        assert!(detail.contains("badResumptionToken"));
        assert!(detail.contains("expired"));
    }

    #[test]
    fn empty_body_is_protocol_error() {
        let err = parse_response("<OAI-PMH></OAI-PMH>").unwrap_err();
        assert!(matches!(err, HarvestError::Protocol { .. }));
    }

    #[test]
    fn deleted_record_is_skipped() {
        let body = r#"<OAI-PMH><ListRecords>
          <record>
            <header status="deleted">
              <identifier>oai:arXiv.org:cs/0101003</identifier>
            </header>
          </record>
          <resumptionToken>tok</resumptionToken>
        </ListRecords></OAI-PMH>"#;
        let PageOutcome::Page {
            records,
            next_token,
        } = parse_response(body).unwrap()
        else {
            panic!("expected a page");
        };
        assert!(records.is_empty());
        assert_eq!(next_token.as_deref(), Some("tok"));
    }

    #[test]
    fn wait_extraction() {
        assert_eq!(extract_wait_seconds("Retry after 600 seconds"), Some(600));
        assert_eq!(extract_wait_seconds("wait 5s"), Some(5));
        assert_eq!(extract_wait_seconds("no digits here"), None);
    }
}
