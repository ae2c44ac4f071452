use std::fmt::Write;

use crate::crawler::CrawlResult;

/// Build the plain-text summary of a crawl.
///
/// Views, then UDFs, under `Views and UDFs:`; tables under `Tables:`.
/// Each group is sorted alphabetically.
pub fn build_summary(result: &CrawlResult) -> String {
    let mut summary = String::new();

    let mut views: Vec<String> = result.views.iter().map(ToString::to_string).collect();
    views.sort();
    let mut tables: Vec<String> = result.tables.iter().map(ToString::to_string).collect();
    tables.sort();

    writeln!(summary, "Views and UDFs:").unwrap();
    for view in &views {
        writeln!(summary, " - {view}").unwrap();
    }
    for (name, class) in &result.functions {
        writeln!(summary, " - {name} ({class})").unwrap();
    }

    writeln!(summary).unwrap();
    writeln!(summary, "Tables:").unwrap();
    for table in &tables {
        writeln!(summary, " - {table}").unwrap();
    }

    summary
}
