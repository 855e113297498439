//! Plain-text rendering of traversal pages.

use placehunt_places::{select_for_display, DetailRecord, PageResult, ResultStatus};

const PHONE_WIDTH: usize = 18;
const NAME_WIDTH: usize = 32;

/// Page heading, e.g. `Page 2 (3 results)`. Counts the places that have a
/// phone number, not the raw search hits.
pub(crate) fn page_title(page: &PageResult) -> String {
    format!(
        "Page {} ({} results)",
        page.page_number,
        page.single_location.len()
    )
}

/// One line describing how the request went. A missing result status is
/// shown as `INVALID_REQUEST`.
pub(crate) fn request_info(page: &PageResult) -> String {
    let res_status = page.res_status.unwrap_or(ResultStatus::InvalidRequest);
    let next_page = if page.has_next_page() { "yes" } else { "no" };
    let line = format!(
        "status: {} {} | result: {res_status} | next page: {next_page}",
        page.status, page.status_text
    );
    match &page.error_message {
        Some(message) => format!("{line} | error: {message}"),
        None => line,
    }
}

fn record_row(record: &DetailRecord) -> String {
    let name = record.name.as_deref().unwrap_or("\u{2014}");
    let address = record.formatted_address.as_deref().unwrap_or("\u{2014}");
    let name_display = if name.chars().count() > NAME_WIDTH - 2 {
        format!("{}...", name.chars().take(NAME_WIDTH - 5).collect::<String>())
    } else {
        name.to_owned()
    };
    format!(
        "{:<PHONE_WIDTH$}{:<NAME_WIDTH$}{address}",
        record.formatted_phone_number, name_display
    )
}

/// Renders a full page block: title, request info and one row per number.
///
/// Only mobile numbers are listed unless `all_numbers` is set.
pub(crate) fn render_page(page: &PageResult, all_numbers: bool) -> String {
    let mut lines = vec![page_title(page), request_info(page)];

    let rows = select_for_display(&page.single_location, all_numbers);
    if rows.is_empty() {
        let what = if all_numbers { "phone" } else { "mobile" };
        lines.push(format!("no {what} numbers on this page"));
    } else {
        lines.push(format!(
            "{:<PHONE_WIDTH$}{:<NAME_WIDTH$}ADDRESS",
            "PHONE", "NAME"
        ));
        lines.extend(rows.into_iter().map(record_row));
    }

    let mut out = lines.join("\n");
    out.push_str("\n\n");
    out
}
