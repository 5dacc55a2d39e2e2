//! Formatting helpers shared by the reporter and commands.

/// Human readable byte count.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// `12.0 MB / 90.1 MB (13%)`, or just the received size when the total is unknown.
pub fn format_progress(current: u64, total: Option<u64>) -> String {
    match total.filter(|&t| t > 0) {
        Some(total) => format!(
            "{} / {} ({}%)",
            format_size(current),
            format_size(total),
            percent(current, total)
        ),
        None => format_size(current),
    }
}

pub(crate) fn percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    (current.min(total) * 100) / total
}
