// multipart/mixed framing for workbook publishing
//
// Tableau only accepts multipart/mixed for publish requests, which reqwest's
// form-data builder doesn't produce, so the body is assembled by hand.
use bytes::{BufMut, Bytes, BytesMut};
use std::path::Path;

use crate::infrastructure::error::TableauError;

pub const BOUNDARY: &str = "tableau-publisher-7d1f0e2c9b";

const WORKBOOK_EXTENSIONS: [&str; 2] = ["twb", "twbx"];

pub struct PublishBody {
    pub content_type: String,
    pub body: Bytes,
}

/// Build the `request_payload` + `tableau_workbook` body for a single-request publish.
pub fn publish_body(request_xml: &str, file_name: &str, file_bytes: &[u8]) -> PublishBody {
    let mut buf = BytesMut::with_capacity(request_xml.len() + file_bytes.len() + 512);

    // 1. Request payload part
    put_part_header(&mut buf, "name=\"request_payload\"", "text/xml");
    buf.put_slice(request_xml.as_bytes());
    buf.put_slice(b"\r\n");

    // 2. Workbook file part
    let disposition = format!("name=\"tableau_workbook\"; filename=\"{}\"", file_name.replace('"', ""));
    put_part_header(&mut buf, &disposition, "application/octet-stream");
    buf.put_slice(file_bytes);
    buf.put_slice(b"\r\n");

    // 3. Closing boundary
    buf.put_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    PublishBody {
        content_type: format!("multipart/mixed; boundary={}", BOUNDARY),
        body: buf.freeze(),
    }
}

fn put_part_header(buf: &mut BytesMut, disposition: &str, content_type: &str) {
    buf.put_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    buf.put_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    buf.put_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
}

/// File name sent to the server; only `.twb` and `.twbx` are publishable.
pub fn workbook_file_name(path: &Path) -> Result<String, TableauError> {
    let invalid = || TableauError::InvalidWorkbookFile(path.display().to_string());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(invalid)?;
    if !WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid());
    }

    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(invalid)
}
