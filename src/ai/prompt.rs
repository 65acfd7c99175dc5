use crate::config::Language;

/// Prompt asking for one short, unusual fact about `topic`.
pub fn build_prompt(topic: &str, category: &str, language: Language) -> String {
    match language {
        Language::Ru => format!(
            "Сгенерируй короткий, интересный и необычный факт на тему: '{}' (категория: {}). \
             Пиши в стиле познавательной заметки для Telegram-канала, избегай банальностей. \
             Пример:\n\
             Знаете ли вы, что у осьминога три сердца, и два из них перестают биться, когда он плывёт?\n\
             Ещё один факт:",
            topic, category
        ),
        Language::En => format!(
            "Generate a short, interesting and unusual fact on the topic: '{}' (category: {}). \
             Write it as an educational note for a Telegram channel and avoid clichés. \
             Example:\n\
             Did you know that an octopus has three hearts, and two of them stop beating while it swims?\n\
             Another fact:",
            topic, category
        ),
    }
}
