// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth + role groups)

pub mod protected; // Tier 2: /api/*
pub mod public; // Tier 1: /auth/login
