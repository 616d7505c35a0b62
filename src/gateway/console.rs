//! Console-backed interaction gateway.
//!
//! Line-oriented stdin/stdout implementation for local runs: modals
//! become labelled prompts, select menus and button groups become
//! numbered lists. A single operator drives the terminal, so the
//! designated-actor rule is trivially satisfied. EOF on stdin is
//! indistinguishable from walking away and surfaces as a timeout.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{
    ChoiceOption, GatewayConfig, InteractionGateway, ModalReply, ModalRequest, SagaContext,
    Submission,
};

pub struct ConsoleGateway {
    cfg: GatewayConfig,
}

impl ConsoleGateway {
    pub fn new(cfg: GatewayConfig) -> Self {
        Self { cfg }
    }

    /// Read one trimmed line from stdin, or `None` on timeout/EOF.
    async fn read_line_within(&self, timeout: Duration) -> Option<String> {
        let mut lines = BufReader::new(stdin()).lines();
        match tokio::time::timeout(timeout, lines.next_line()).await {
            Ok(Ok(Some(line))) => Some(line.trim().to_string()),
            Ok(Ok(None)) | Ok(Err(_)) => None,
            Err(_) => None,
        }
    }

    /// Present numbered options and resolve the operator's pick.
    ///
    /// Accepts either the option number or its key, case-insensitively.
    async fn pick(
        &self,
        prompt: &str,
        options: &[ChoiceOption],
        timeout: Duration,
    ) -> Submission<String> {
        println!("\n{prompt}");
        for (i, opt) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, opt.label);
        }
        print!("> ");
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let Some(line) = self.read_line_within(timeout).await else {
            return Submission::TimedOut;
        };

        let chosen = if let Ok(n) = line.parse::<usize>() {
            options.get(n.wrapping_sub(1))
        } else {
            options.iter().find(|o| o.key.eq_ignore_ascii_case(&line))
        };

        match chosen {
            Some(opt) if opt.is_cancel => Submission::Cancelled,
            Some(opt) => Submission::Answered(opt.key.clone()),
            None => {
                // Unrecognised input counts as no response.
                debug!(input = %line, "Unrecognised console selection");
                Submission::TimedOut
            }
        }
    }
}

#[async_trait]
impl InteractionGateway for ConsoleGateway {
    async fn present_modal(
        &self,
        ctx: &SagaContext,
        request: ModalRequest,
    ) -> Submission<ModalReply> {
        debug!(run_id = %ctx.run_id, title = %request.title, "Presenting console modal");
        println!("\n=== {} ===", request.title);

        let mut values = HashMap::new();
        for field in &request.fields {
            println!("{}", field.label);
            print!("> ");
            use std::io::Write;
            let _ = std::io::stdout().flush();

            let Some(line) = self.read_line_within(self.cfg.modal_timeout).await else {
                return Submission::TimedOut;
            };
            values.insert(field.id.clone(), line);
        }

        Submission::Answered(ModalReply::new(values))
    }

    async fn present_choice(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String> {
        debug!(run_id = %ctx.run_id, options = options.len(), "Presenting console choice");
        self.pick(prompt, options, self.cfg.choice_timeout).await
    }

    async fn present_buttons(
        &self,
        ctx: &SagaContext,
        prompt: &str,
        options: &[ChoiceOption],
    ) -> Submission<String> {
        debug!(run_id = %ctx.run_id, options = options.len(), "Presenting console buttons");
        self.pick(prompt, options, self.cfg.button_timeout).await
    }

    async fn reply(&self, ctx: &SagaContext, text: &str) -> Result<()> {
        debug!(run_id = %ctx.run_id, "Console reply");
        println!("\n{text}");
        Ok(())
    }
}
