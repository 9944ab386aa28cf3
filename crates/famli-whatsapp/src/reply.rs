//! User-facing reply texts

use famli_core::{Category, Item};

use crate::dialogue::{DialogueState, PendingItem};

pub const LINK_COMMAND: &str = "vincular";

pub fn help(profile_name: Option<&str>) -> String {
    let greeting = match profile_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Olá, {}! 👋", name),
        None => "Olá! 👋".to_string(),
    };

    format!(
        "{}\n\nSou o assistente da Famli. Envie um texto, foto, áudio, documento ou localização \
         e eu guardo no seu cofre.\n\nComandos:\n\
         • *ajuda* - mostra esta mensagem\n\
         • *salvar* - começa a guardar um item\n\
         • *listar* - seus itens mais recentes\n\
         • *status* - situação da sua conta\n\
         • *cancelar* - cancela o item em andamento\n\
         • *{}* - conecta este número à sua conta Famli",
        greeting, LINK_COMMAND
    )
}

pub fn save_prompt() -> String {
    "Me envie o que você quer guardar: um texto, foto, áudio, documento ou localização.".to_string()
}

pub fn link_required() -> String {
    format!(
        "Este número ainda não está conectado a uma conta Famli. \
         Envie *{}* para receber um código de conexão.",
        LINK_COMMAND
    )
}

pub fn link_code(code: &str, valid_minutes: i64) -> String {
    format!(
        "Seu código de conexão é *{}*.\n\nDigite este código no app Famli em \
         Configurações > WhatsApp. Ele vale por {} minutos.",
        code, valid_minutes
    )
}

pub fn already_linked() -> String {
    "Este número já está conectado à sua conta Famli. ✅".to_string()
}

pub fn link_confirmed() -> String {
    "Pronto! Seu WhatsApp foi conectado à sua conta Famli. ✅\n\nEnvie *ajuda* para ver o que posso fazer."
        .to_string()
}

pub fn unlinked() -> String {
    format!(
        "Este número foi desconectado da sua conta Famli. Envie *{}* para conectar de novo.",
        LINK_COMMAND
    )
}

pub fn category_menu(draft: &PendingItem) -> String {
    let options = Category::ALL
        .iter()
        .map(|c| format!("{}. {}", c.menu_number(), c.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Vou guardar: *{}*\n\nEm qual categoria?\n{}\n\nResponda com o número ou o nome.",
        draft.title, options
    )
}

pub fn confirm_prompt(draft: &PendingItem) -> String {
    format!(
        "Confirma salvar *{}* em *{}*?\n\nResponda *sim* para salvar, *não* para descartar \
         ou envie um novo título.",
        draft.title,
        draft.category.label()
    )
}

pub fn saved(title: &str, category: Category) -> String {
    format!("✅ *{}* foi salvo em {}.", title, category.label())
}

pub fn save_failed() -> String {
    "😕 Não consegui salvar agora. Tente novamente em instantes enviando o conteúdo de novo."
        .to_string()
}

pub fn cancelled() -> String {
    "Ok, descartei esse item.".to_string()
}

pub fn nothing_to_cancel() -> String {
    "Não há nada em andamento para cancelar.".to_string()
}

pub fn item_list(items: &[Item]) -> String {
    if items.is_empty() {
        return "Você ainda não tem itens salvos. Envie algo para começar!".to_string();
    }

    let lines = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. [{}] {}", i + 1, item.category.label(), item.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Seus itens mais recentes:\n{}", lines)
}

pub fn status(linked: bool, state: &DialogueState, item_count: Option<usize>) -> String {
    let account = if linked {
        "conectado ✅".to_string()
    } else {
        format!("não conectado (envie *{}*)", LINK_COMMAND)
    };

    let progress = match state {
        DialogueState::Idle => "nenhum item em andamento".to_string(),
        DialogueState::AwaitingCategory(draft) => {
            format!("escolhendo categoria para *{}*", draft.title)
        }
        DialogueState::AwaitingConfirmation(draft) => {
            format!("aguardando confirmação de *{}*", draft.title)
        }
    };

    let mut text = format!("Conta: {}\nAndamento: {}", account, progress);
    if let Some(count) = item_count {
        text.push_str(&format!("\nItens salvos: {}", count));
    }
    text
}

pub fn apology() -> String {
    "Desculpe, não consegui entender sua mensagem. Tente novamente.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use famli_core::ItemType;

    fn draft() -> PendingItem {
        PendingItem {
            content: "Conteúdo".to_string(),
            category: Category::Health,
            item_type: ItemType::Note,
            media_url: None,
            media_type: None,
            title: "Exame de sangue".to_string(),
        }
    }

    #[test]
    fn test_category_menu_lists_five_options() {
        let menu = category_menu(&draft());
        for line in ["1. Documentos", "2. Saúde", "3. Finanças", "4. Memórias", "5. Outros"] {
            assert!(menu.contains(line), "missing {line}");
        }
        assert!(menu.contains("Exame de sangue"));
    }

    #[test]
    fn test_confirm_prompt_shows_category() {
        let prompt = confirm_prompt(&draft());
        assert!(prompt.contains("Saúde"));
        assert!(prompt.contains("sim"));
    }

    #[test]
    fn test_help_greets_by_name() {
        assert!(help(Some("Ana")).starts_with("Olá, Ana!"));
        assert!(help(Some("  ")).starts_with("Olá! "));
        assert!(help(None).contains(LINK_COMMAND));
    }

    #[test]
    fn test_link_required_mentions_command() {
        assert!(link_required().contains("vincular"));
    }

    #[test]
    fn test_status_text() {
        let text = status(false, &DialogueState::Idle, None);
        assert!(text.contains("não conectado"));
        assert!(!text.contains("Itens salvos"));

        let text = status(true, &DialogueState::AwaitingConfirmation(draft()), Some(3));
        assert!(text.contains("aguardando confirmação"));
        assert!(text.contains("Itens salvos: 3"));
    }
}
