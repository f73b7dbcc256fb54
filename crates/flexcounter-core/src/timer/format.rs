/// Render a reading as `H:MM:SS`, with a leading `-` for overtime.
pub fn format_clock(secs: i64) -> String {
    format_reading(secs, true)
}

/// Render a reading as `H:MM:SS`. Overtime is shown as the magnitude only
/// when `show_sign` is false.
pub fn format_reading(secs: i64, show_sign: bool) -> String {
    let magnitude = secs.unsigned_abs();
    let hours = magnitude / 3600;
    let minutes = (magnitude % 3600) / 60;
    let seconds = magnitude % 60;
    let sign = if secs < 0 && show_sign { "-" } else { "" };
    format!("{sign}{hours}:{minutes:02}:{seconds:02}")
}
