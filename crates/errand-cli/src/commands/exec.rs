//! `errand exec` -- run one command through the policy gateway.

use std::sync::Arc;

use errand_channel::TerminalSink;
use errand_gateway::Gateway;
use errand_types::{ExecutionContext, Settings, TaskContext};

pub async fn run(settings: &Settings, command: &str) -> anyhow::Result<()> {
    let gateway = Gateway::new(settings.mode());
    let ctx = TaskContext::new(ExecutionContext::Local, Arc::new(TerminalSink));

    let result = gateway.run(command, &ctx).await;

    if !result.stdout.is_empty() {
        println!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprintln!("{}", result.stderr);
    }
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
