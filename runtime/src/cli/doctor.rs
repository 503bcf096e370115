// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::config::ServiceConfig;
use crate::renderer::chromium::{find_chromium, launch_args};
use anyhow::Result;

fn debug_port_line(port: Option<u16>) -> String {
    match port {
        Some(port) => format!(
            "Debugging port: {port} (fixed; concurrent /web-content requests will conflict)"
        ),
        None => "Debugging port: ephemeral (one per browser, so concurrent requests never collide)"
            .to_string(),
    }
}

/// Report which Chromium binary would be used and with which switches.
pub async fn run(config: &ServiceConfig) -> Result<()> {
    println!("pagetext doctor");
    println!("===============");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium_path = find_chromium(config.render.chromium_path.as_deref());
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set PAGETEXT_CHROMIUM_PATH."
        ),
    }

    println!("     Launch args: {}", launch_args(&config.render).join(" "));
    println!("     {}", debug_port_line(config.render.debugging_port));
    println!(
        "     Readiness: `{}` within {}ms, then {}ms settle",
        config.render.ready_selector, config.render.ready_timeout_ms, config.render.settle_ms
    );
    println!(
        "     Transcript languages: {}",
        config.transcript.languages.join(", ")
    );
    println!("     Bind: {}", config.bind);

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY (/web-content will fail, /youtube-transcript still works)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_port_line_explains_choice() {
        assert!(debug_port_line(None).contains("ephemeral"));
        let fixed = debug_port_line(Some(9222));
        assert!(fixed.contains("9222"));
        assert!(fixed.contains("conflict"));
    }
}
