//! Scripted interaction gateway for integration testing.
//!
//! Each UI shape has its own queue of scripted responses tagged with
//! the responding actor. Responses from anyone but the designated actor
//! are ignored, exactly as the gateway contract demands; an exhausted
//! queue means nobody answered, which surfaces as a timeout. Every
//! prompt and reply is recorded for assertions.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use ringside::gateway::{
    ChoiceOption, InteractionGateway, ModalReply, ModalRequest, SagaContext, Submission,
};

/// One scripted response: who pressed/typed, and what.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub actor: String,
    pub value: String,
}

impl ScriptedResponse {
    pub fn from(actor: &str, value: &str) -> Self {
        Self {
            actor: actor.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Default)]
pub struct ScriptedGateway {
    modal_script: Mutex<VecDeque<ScriptedResponse>>,
    choice_script: Mutex<VecDeque<ScriptedResponse>>,
    button_script: Mutex<VecDeque<ScriptedResponse>>,
    /// Prompts shown, in order (modal titles, choice/button prompts).
    prompts: Mutex<Vec<String>>,
    /// Option keys offered at the most recent choice prompt.
    choice_keys: Mutex<Vec<Vec<String>>>,
    /// Terminal and interim messages delivered to the user.
    replies: Mutex<Vec<String>>,
    /// Responses dropped because the actor was not designated.
    ignored: Mutex<Vec<ScriptedResponse>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_modal(self, actor: &str, value: &str) -> Self {
        self.modal_script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::from(actor, value));
        self
    }

    pub fn script_choice(self, actor: &str, value: &str) -> Self {
        self.choice_script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::from(actor, value));
        self
    }

    pub fn script_button(self, actor: &str, value: &str) -> Self {
        self.button_script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::from(actor, value));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn choice_keys(&self) -> Vec<Vec<String>> {
        self.choice_keys.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }

    pub fn ignored(&self) -> Vec<ScriptedResponse> {
        self.ignored.lock().unwrap().clone()
    }

    /// Drain a script queue until the designated actor responds with one
    /// of the offered options. Anything else is recorded as ignored.
    fn resolve(
        &self,
        script: &Mutex<VecDeque<ScriptedResponse>>,
        ctx: &SagaContext,
        options: &[ChoiceOption],
    ) -> Submission<String> {
        let mut queue = script.lock().unwrap();
        while let Some(response) = queue.pop_front() {
            if response.actor != ctx.user_id {
                self.ignored.lock().unwrap().push(response);
                continue;
            }
            let Some(option) = options.iter().find(|o| o.key == response.value) else {
                self.ignored.lock().unwrap().push(response);
                continue;
            };
            if option.is_cancel {
                return Submission::Cancelled;
            }
            return Submission::Answered(option.key.clone());
        }
        Submission::TimedOut
    }
}

#[async_trait]
impl InteractionGateway for ScriptedGateway {
    async fn present_modal(
        &self,
        ctx: &SagaContext,
        request: ModalRequest,
    ) -> Submission<ModalReply> {
        self.prompts.lock().unwrap().push(request.title.clone());

        let mut queue = self.modal_script.lock().unwrap();
        while let Some(response) = queue.pop_front() {
            if response.actor != ctx.user_id {
                self.ignored.lock().unwrap().push(response);
                continue;
            }
            let field_id = request
                .fields
                .first()
                .map(|f| f.id.clone())
                .unwrap_or_default();
            return Submission::Answered(ModalReply::single(field_id, response.value));
        }
        Submission::TimedOut
    }

    async fn present_choice(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.choice_keys
            .lock()
            .unwrap()
            .push(options.iter().map(|o| o.key.clone()).collect());
        self.resolve(&self.choice_script, ctx, options)
    }

    async fn present_buttons(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.resolve(&self.button_script, ctx, options)
    }

    async fn reply(&self, _ctx: &SagaContext, text: &str) -> Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wrong_actor_is_ignored_then_times_out() {
        let gateway = ScriptedGateway::new().script_choice("intruder", "A");
        let ctx = SagaContext::new("user-1");
        let options = vec![ChoiceOption::new("A", "Option A")];

        let result = gateway.present_choice(&ctx, "pick", &options).await;
        assert_eq!(result, Submission::TimedOut);
        assert_eq!(gateway.ignored().len(), 1);
        assert_eq!(gateway.ignored()[0].actor, "intruder");
    }

    #[tokio::test]
    async fn test_cancel_option_resolves_cancelled() {
        let gateway = ScriptedGateway::new().script_choice("user-1", "Cancel");
        let ctx = SagaContext::new("user-1");
        let options = vec![ChoiceOption::new("A", "Option A"), ChoiceOption::cancel()];

        let result = gateway.present_choice(&ctx, "pick", &options).await;
        assert_eq!(result, Submission::Cancelled);
    }

    #[tokio::test]
    async fn test_designated_actor_resolves_answered() {
        let gateway = ScriptedGateway::new()
            .script_choice("intruder", "A")
            .script_choice("user-1", "A");
        let ctx = SagaContext::new("user-1");
        let options = vec![ChoiceOption::new("A", "Option A")];

        let result = gateway.present_choice(&ctx, "pick", &options).await;
        assert_eq!(result, Submission::Answered("A".to_string()));
        assert_eq!(gateway.ignored().len(), 1);
    }
}
