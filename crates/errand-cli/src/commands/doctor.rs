//! `errand doctor` -- print the effective configuration.

use errand_types::Settings;

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", summary(settings));
    Ok(())
}

fn summary(settings: &Settings) -> String {
    let mut out = String::new();
    let w = &settings.watcher;

    out.push_str(&format!("operating mode:      {:?}\n", settings.mode()));
    out.push_str(&format!("execution enabled:   {}\n", settings.execution_enabled));
    out.push_str(&format!("watcher enabled:     {}\n", settings.watcher_enabled));
    out.push_str(&format!("demo mode:           {}\n", settings.demo_mode));
    out.push('\n');
    out.push_str(&format!("watch max duration:  {}s\n", w.max_duration.as_secs()));
    out.push_str(&format!("watch base interval: {}s\n", w.base_interval.as_secs()));
    out.push_str(&format!("watch max interval:  {}s\n", w.max_interval.as_secs()));
    out.push_str(&format!("change threshold:    {}%\n", w.change_threshold));
    out.push_str(&format!("watch max retries:   {}\n", w.max_retries));
    out.push_str(&format!("screenshot command:  {}\n", settings.screenshot_cmd));
    out.push('\n');
    out.push_str(&format!("oracle url:          {}\n", settings.oracle.primary.url));
    out.push_str(&format!("oracle model:        {}\n", settings.oracle.primary.model));
    out.push_str(&format!(
        "oracle api key:      {}\n",
        redact(settings.oracle.primary.api_key.as_deref())
    ));
    match &settings.oracle.fallback {
        Some(fb) => {
            out.push_str(&format!("fallback url:        {}\n", fb.url));
            out.push_str(&format!("fallback model:      {}\n", fb.model));
            out.push_str(&format!(
                "fallback api key:    {}\n",
                redact(fb.api_key.as_deref())
            ));
        }
        None => out.push_str("fallback oracle:     (none)\n"),
    }
    out.push_str(&format!(
        "oracle call timeout: {}s\n",
        settings.oracle.call_timeout.as_secs()
    ));
    out.push('\n');
    match &settings.telegram {
        Some(tg) => {
            out.push_str(&format!("telegram chat id:    {}\n", tg.chat_id));
            out.push_str("telegram token:      (set)\n");
        }
        None => out.push_str("telegram:            (not configured)\n"),
    }
    out.push_str(&format!(
        "prompt timeout:      {}s\n",
        settings.prompt_timeout.as_secs()
    ));
    out
}

fn redact(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "(set)",
        None => "(not set)",
    }
}
