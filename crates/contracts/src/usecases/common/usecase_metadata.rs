/// Метаданные UseCase: идентификация, заголовок страницы и путь API
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u501")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "compress_file")
    fn usecase_name() -> &'static str;

    /// Заголовок для UI
    fn display_name() -> &'static str;

    /// Подзаголовок для UI
    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u501_compress_file"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
