//! Markdown rendering of notice documents.
//!
//! Layout:
//!
//! ```text
//! ## <title>
//!
//! [发布时间] <date>
//!
//! ---
//!
//! [摘要]
//! <summary>
//!
//!
//! [附件列表]
//! - [<name>](<path>)
//! ```
//!
//! The attachment section is only present when at least one attachment was
//! saved.

use crate::models::NoticeDocument;
use std::fmt::Write;

/// Render a notice as Markdown text.
pub fn render_notice(doc: &NoticeDocument) -> String {
    let mut md = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        md,
        "## {}\n\n[发布时间] {}\n\n---\n\n[摘要]\n{}\n\n",
        doc.title, doc.publish_date, doc.summary
    );

    if !doc.attachments.is_empty() {
        md.push_str("\n[附件列表]\n");
        for attachment in &doc.attachments {
            let _ = writeln!(
                md,
                "- [{}]({})",
                attachment.display_name,
                attachment.local_path.display()
            );
        }
    }
    md
}
