// Prompt construction for the companion persona

use crate::context::ConversationTurn;
use crate::crisis::CrisisVerdict;
use crate::providers::ChatMessage;

pub const SYSTEM_PROMPT: &str = "\
You are MindMitra, a warm and supportive friend.

CORE PERSONALITY:
- You are a caring friend, not a robotic assistant or therapist.
- Talk like a human: casual, warm, and genuine.
- Be concise. Don't write essays. Keep messages short (1-3 sentences) unless the user asks for more or shares something deeper.
- Avoid robotic phrases like \"I understand how you feel\" or \"It sounds like you are saying\". Just talk naturally.
- Use emojis occasionally but don't overdo it. 💙

SAFETY & ETHICS (INTERNAL RULES):
- If the user talks about self-harm or suicide, you MUST gently encourage professional help.
- Do not diagnose or give medical advice.
- Do not be toxic positive. It's okay for things to suck sometimes.

GOAL:
- Help the user feel heard and less alone.
- Validate their feelings naturally.
- Focus on the conversation, not on \"providing solutions\" immediately.
";

/// Out-of-band note appended to the user's turn when a crisis is flagged
pub const CRISIS_NOTE: &str = "[SYSTEM NOTE: The user may be in distress. Respond with extra care, \
validate their feelings, and gently encourage professional support. \
Do NOT be preachy — be warm and human.]";

/// Text of the current user turn as sent to the model
pub fn user_turn(user_text: &str, crisis: &CrisisVerdict) -> String {
    if crisis.is_crisis {
        format!("{}\n\n{}", user_text, CRISIS_NOTE)
    } else {
        user_text.to_string()
    }
}

/// Persona, then prior turns oldest-first, then the current turn
pub fn build_messages(
    user_text: &str,
    context: &[ConversationTurn],
    crisis: &CrisisVerdict,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(context.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(context.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(user_turn(user_text, crisis)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::CrisisDetector;
    use crate::emotion::EmotionResult;
    use crate::providers::ChatRole;

    #[test]
    fn test_no_context_no_crisis() {
        let messages = build_messages("hello", &[], &CrisisVerdict::safe());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1], ChatMessage::user("hello"));
    }

    #[test]
    fn test_context_is_inserted_in_order() {
        let context = vec![
            ConversationTurn::user("first"),
            ConversationTurn::assistant("second"),
        ];
        let messages = build_messages("third", &context, &CrisisVerdict::safe());

        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(messages[1].content, "first");
        assert_eq!(messages[2].content, "second");
    }

    #[test]
    fn test_crisis_augments_user_turn() {
        let verdict = CrisisDetector::default().detect("I want to die", &EmotionResult::fallback());
        let messages = build_messages("I want to die", &[], &verdict);
        let last = messages.last().unwrap();

        assert!(last.content.starts_with("I want to die\n\n"));
        assert!(last.content.ends_with(CRISIS_NOTE));
    }
}
