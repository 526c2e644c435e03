use crate::config::{DEFAULT_USER_ID, DEFAULT_USER_NAME, EXPORT_TYPE_MANGA, XML_INDENT};
use crate::models::{FieldKind, MangaRecord, Status};
use crate::stats::{normalize_status_key, StatusCounts};
use anyhow::{Context, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Identity written into the `<myinfo>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: String,
    pub user_name: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

fn write_text_element<W: Write>(wr: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
    wr.write_event(Event::Start(BytesStart::new(tag)))?;
    wr.write_event(Event::Text(BytesText::new(value)))?;
    wr.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// CDATA cannot contain `]]>`, so such text is split over adjacent sections.
fn write_cdata_element<W: Write>(wr: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
    wr.write_event(Event::Start(BytesStart::new(tag)))?;
    let mut rest = value;
    while let Some(pos) = rest.find("]]>") {
        wr.write_event(Event::CData(BytesCData::new(&rest[..pos + 2])))?;
        rest = &rest[pos + 2..];
    }
    wr.write_event(Event::CData(BytesCData::new(rest)))?;
    wr.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_header<W: Write>(
    wr: &mut Writer<W>,
    user: &UserInfo,
    record_count: usize,
    counts: &StatusCounts,
) -> Result<()> {
    wr.write_event(Event::Start(BytesStart::new("myinfo")))?;
    write_text_element(wr, "user_id", &user.user_id)?;
    write_text_element(wr, "user_name", &user.user_name)?;
    write_text_element(wr, "user_export_type", EXPORT_TYPE_MANGA)?;
    write_text_element(wr, "user_total_manga", &record_count.to_string())?;
    for status in Status::ALL {
        let key = normalize_status_key(status.label());
        let tag = format!("user_total_{}", key);
        write_text_element(wr, &tag, &counts.get_key(&key).to_string())?;
    }
    wr.write_event(Event::End(BytesEnd::new("myinfo")))?;
    Ok(())
}

fn write_record<W: Write>(wr: &mut Writer<W>, record: &MangaRecord) -> Result<()> {
    wr.write_event(Event::Start(BytesStart::new("manga")))?;
    for (tag, kind, value) in record.fields() {
        match kind {
            FieldKind::Text => write_text_element(wr, tag, value)?,
            FieldKind::CData => write_cdata_element(wr, tag, value)?,
        }
    }
    wr.write_event(Event::End(BytesEnd::new("manga")))?;
    Ok(())
}

/// Writes the complete `<myanimelist>` document: declaration, `<myinfo>`
/// header, then one `<manga>` element per record in input order.
pub fn write_document<W: Write>(
    out: W,
    user: &UserInfo,
    records: &[MangaRecord],
    counts: &StatusCounts,
) -> Result<()> {
    let mut wr = Writer::new_with_indent(out, b' ', XML_INDENT);

    wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;
    wr.write_event(Event::Start(BytesStart::new("myanimelist")))?;
    write_header(&mut wr, user, records.len(), counts).context("Failed to write header")?;
    for record in records {
        write_record(&mut wr, record).with_context(|| {
            format!("Failed to write record {}", record.manga_mangadb_id)
        })?;
    }
    wr.write_event(Event::End(BytesEnd::new("myanimelist")))?;

    let mut out = wr.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// [`write_document`] into a string.
pub fn render_document(
    user: &UserInfo,
    records: &[MangaRecord],
    counts: &StatusCounts,
) -> Result<String> {
    let mut buf = Vec::new();
    write_document(&mut buf, user, records, counts)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use quick_xml::Reader;

    /// Flattens a document into `(path, text)` leaves, checking that every
    /// start tag is closed by the matching end tag.
    fn leaves(xml: &str) -> Vec<(String, String)> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut stack: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    stack.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap());
                    text.clear();
                }
                Event::Text(e) => text.push_str(&e.unescape().unwrap()),
                Event::CData(e) => text.push_str(std::str::from_utf8(&e.into_inner()).unwrap()),
                Event::End(e) => {
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    assert_eq!(stack.pop().as_deref(), Some(name.as_str()));
                    out.push((name, std::mem::take(&mut text)));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        assert!(stack.is_empty());
        out
    }

    fn value<'a>(leaves: &'a [(String, String)], tag: &str) -> &'a str {
        leaves
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    fn sample_record() -> MangaRecord {
        MangaRecord {
            manga_mangadb_id: "42".to_string(),
            manga_title: "Foo, Bar".to_string(),
            my_read_chapters: "5".to_string(),
            my_score: "8".to_string(),
            my_status: "Reading".to_string(),
            my_start_date: "2023-01-15".to_string(),
            my_finish_date: "2023-01-15".to_string(),
            ..MangaRecord::template()
        }
    }

    #[test]
    fn empty_document_is_well_formed() {
        let xml = render_document(&UserInfo::default(), &[], &aggregate(&[])).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(!xml.contains("<manga>"));

        let leaves = leaves(&xml);
        assert_eq!(value(&leaves, "user_total_manga"), "0");
        for tag in [
            "user_total_reading",
            "user_total_completed",
            "user_total_onhold",
            "user_total_dropped",
            "user_total_plantoread",
        ] {
            assert_eq!(value(&leaves, tag), "0", "{}", tag);
        }
        assert_eq!(value(&leaves, "user_export_type"), "2");
    }

    #[test]
    fn title_is_wrapped_in_cdata() {
        let records = vec![sample_record()];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        assert!(xml.contains("<![CDATA[Foo, Bar]]>"));
    }

    #[test]
    fn record_has_all_fields_in_order() {
        let records = vec![sample_record()];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        let leaves = leaves(&xml);

        let manga_fields: Vec<&str> = leaves
            .iter()
            .skip_while(|(t, _)| t != "myinfo")
            .skip(1)
            .take_while(|(t, _)| t != "manga")
            .map(|(t, _)| t.as_str())
            .collect();
        let expected: Vec<&str> = records[0].fields().iter().map(|(t, _, _)| *t).collect();
        assert_eq!(manga_fields, expected);

        assert_eq!(value(&leaves, "manga_mangadb_id"), "42");
        assert_eq!(value(&leaves, "manga_title"), "Foo, Bar");
        assert_eq!(value(&leaves, "my_status"), "Reading");
        assert_eq!(value(&leaves, "my_start_date"), "2023-01-15");
        assert_eq!(value(&leaves, "my_finish_date"), "2023-01-15");
        assert_eq!(value(&leaves, "my_reread_value"), "Low");
        assert_eq!(value(&leaves, "update_on_import"), "1");
        assert_eq!(value(&leaves, "user_total_reading"), "1");
        assert_eq!(value(&leaves, "user_total_manga"), "1");
    }

    #[test]
    fn header_precedes_records() {
        let records = vec![sample_record(), sample_record()];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        let header_end = xml.find("</myinfo>").unwrap();
        let first_manga = xml.find("<manga>").unwrap();
        assert!(header_end < first_manga);
        assert_eq!(xml.matches("<manga>").count(), 2);
        assert_eq!(xml.matches("</manga>").count(), 2);
    }

    #[test]
    fn user_info_is_written() {
        let user = UserInfo {
            user_id: "123".to_string(),
            user_name: "reader".to_string(),
        };
        let xml = render_document(&user, &[], &aggregate(&[])).unwrap();
        let leaves = leaves(&xml);
        assert_eq!(value(&leaves, "user_id"), "123");
        assert_eq!(value(&leaves, "user_name"), "reader");
    }

    #[test]
    fn markup_in_title_survives() {
        let record = MangaRecord {
            manga_title: "<b>Tom & Jerry</b>".to_string(),
            ..sample_record()
        };
        let records = vec![record];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        assert!(xml.contains("<![CDATA[<b>Tom & Jerry</b>]]>"));
        assert_eq!(value(&leaves(&xml), "manga_title"), "<b>Tom & Jerry</b>");
    }

    #[test]
    fn cdata_terminator_in_title_is_split() {
        let record = MangaRecord {
            manga_title: "a]]>b".to_string(),
            ..sample_record()
        };
        let records = vec![record];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        assert!(!xml.contains("<![CDATA[a]]>b]]>"));
        assert_eq!(value(&leaves(&xml), "manga_title"), "a]]>b");
    }

    #[test]
    fn text_fields_are_escaped() {
        let record = MangaRecord {
            my_score: "<8>".to_string(),
            ..sample_record()
        };
        let records = vec![record];
        let xml = render_document(&UserInfo::default(), &records, &aggregate(&records)).unwrap();
        assert!(xml.contains("&lt;8&gt;"));
        assert_eq!(value(&leaves(&xml), "my_score"), "<8>");
    }
}
