// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod auth;
pub mod calculator;
pub mod crawler;
pub mod version;
