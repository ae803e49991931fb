// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config command

use nodepool_core::PoolConfig;

pub fn handle(config: &PoolConfig) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &PoolConfig) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
