//! Output generation.
//!
//! # Submodules
//!
//! - [`markdown`]: renders a [`NoticeDocument`](crate::models::NoticeDocument)
//!   as Markdown
//!
//! # Output Structure
//!
//! ```text
//! attachments/
//! ├── 报名表.docx
//! └── 日程安排.pdf
//!
//! 通知输出/
//! ├── 关于举办培训班的通知.md
//! └── 2025年度评优结果公示.md
//! ```

pub mod markdown;
