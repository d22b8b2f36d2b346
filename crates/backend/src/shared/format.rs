/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1.234.567");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Размер результата в процентах от исходного, например "42.5%"
pub fn compression_ratio(original: usize, compressed: usize) -> String {
    if original == 0 {
        return "n/a".to_string();
    }
    format!("{:.1}%", compressed as f64 * 100.0 / original as f64)
}
