//! Command, category and confirmation parsing
//!
//! Everything here is a pure lookup over a fixed vocabulary. Unmatched input
//! is an expected outcome: callers fall back to treating it as content.

use famli_core::Category;

/// Commands understood in any dialogue state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Save,
    List,
    Cancel,
    Status,
    Link,
}

const COMMANDS: &[(Command, &[&str])] = &[
    (
        Command::Help,
        &["help", "ajuda", "oi", "olá", "ola", "menu", "hi", "hello", "inicio", "início"],
    ),
    (Command::Save, &["save", "salvar", "guardar"]),
    (Command::List, &["list", "listar", "lista", "itens", "meus itens"]),
    (Command::Cancel, &["cancel", "cancelar", "sair"]),
    (Command::Status, &["status"]),
    (Command::Link, &["link", "vincular", "conectar"]),
];

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Documents,
        &[
            "documento", "documentos", "document", "documents", "docs", "doc", "rg", "cpf", "cnh",
            "passaporte", "certidao", "certidão", "contrato",
        ],
    ),
    (
        Category::Health,
        &[
            "saude", "saúde", "health", "medico", "médico", "remedio", "remédio", "exame",
            "exames", "vacina", "vacinas",
        ],
    ),
    (
        Category::Finance,
        &[
            "financas", "finanças", "finance", "financeiro", "banco", "dinheiro", "conta",
            "contas", "cartao", "cartão", "investimento", "investimentos",
        ],
    ),
    (
        Category::Memories,
        &[
            "memoria", "memória", "memorias", "memórias", "memory", "memories", "lembranca",
            "lembrança", "lembrancas", "lembranças", "foto", "fotos", "familia", "família",
        ],
    ),
    (Category::Other, &["outro", "outros", "outra", "outras", "other"]),
];

const AFFIRMATIVE: &[&str] = &[
    "sim", "s", "yes", "y", "ok", "okay", "confirmar", "confirmo", "isso", "pode", "salva",
];

const NEGATIVE: &[&str] = &["não", "nao", "n", "no", "cancelar", "cancel"];

/// Answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmative,
    Negative,
}

fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let trimmed = lowered.trim_end_matches(['!', '?', '.']);
    trimmed.strip_prefix('/').unwrap_or(trimmed).trim().to_string()
}

/// Parse a message body as a command.
pub fn parse(raw: &str) -> Option<Command> {
    let text = normalize(raw);
    if text.is_empty() {
        return None;
    }

    COMMANDS
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&text.as_str()))
        .map(|(command, _)| *command)
}

/// Pick a category from a menu answer. Unrecognised input maps to `Other`.
pub fn parse_category(raw: &str) -> Category {
    let text = normalize(raw);
    let shortcut = text.trim_end_matches(')');

    if let Ok(n) = shortcut.parse::<usize>() {
        return Category::from_menu_number(n).unwrap_or(Category::Other);
    }

    if let Some((category, _)) = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.contains(&text.as_str()))
    {
        return *category;
    }

    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Parse an answer to "save this?"
pub fn parse_confirmation(raw: &str) -> Option<Confirmation> {
    let text = normalize(raw);
    if AFFIRMATIVE.contains(&text.as_str()) {
        Some(Confirmation::Affirmative)
    } else if NEGATIVE.contains(&text.as_str()) {
        Some(Confirmation::Negative)
    } else {
        None
    }
}
