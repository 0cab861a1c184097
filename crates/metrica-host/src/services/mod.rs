// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-side services: where settings live, and how input lines reach the
// plugin.

pub mod data_dir;
pub mod protocol;
