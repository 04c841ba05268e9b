// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod auth_middleware;
pub mod calculator;
pub mod completion;
pub mod crawl_job;
pub mod engine;
pub mod logging;
pub mod normalizer;
pub mod page_processor;
pub mod token;
