use crate::models::{Conversation, Role};

pub fn export_to_markdown(conversation: &Conversation) -> String {
    let mut output = format!("# Conversation {}\n\n", conversation.id);
    output.push_str(&format!(
        "> Started: {} | Messages: {}\n\n",
        conversation.created_at.format("%Y-%m-%d %H:%M"),
        conversation.message_count()
    ));

    output.push_str("---\n\n");

    for msg in &conversation.messages {
        let role_label = match msg.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        output.push_str(&format!("### {}\n\n{}\n\n", role_label, msg.content));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_export_lists_messages_in_order() {
        let at = Utc.with_ymd_and_hms(2026, 2, 2, 17, 54, 0).unwrap();
        let conversation = Conversation {
            id: 9,
            created_at: at,
            updated_at: at,
            messages: vec![
                Message::local(Role::User, "add a task to buy milk"),
                Message::local(Role::Assistant, "Task created."),
            ],
        };

        let md = export_to_markdown(&conversation);
        assert!(md.starts_with("# Conversation 9\n"));
        assert!(md.contains("> Started: 2026-02-02 17:54 | Messages: 2"));
        let you = md.find("### You").unwrap();
        let assistant = md.find("### Assistant").unwrap();
        assert!(you < assistant);
    }
}
