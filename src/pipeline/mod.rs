//! Pipeline stages for PDF-to-PNG conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested against a fake engine without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ assemble
//! (bytes)   (page 1)   (PNG)      (name + URL)
//!                                     │
//!           any error ──▶ classify ───┘
//! ```
//!
//! 1. [`input`]    read the file's bytes
//! 2. [`scale`]    choose the render multiplier from the page's natural size
//! 3. [`render`]   paint page 1 onto a fresh surface; runs inside
//!    `spawn_blocking` because PDFium is not async-safe
//! 4. [`encode`]   serialize the surface to PNG bytes (native or data-URL route)
//! 5. [`assemble`] name the file, register its object URL, build the result
//! 6. [`classify`] turn any failure into the single user-facing message

pub mod assemble;
pub mod classify;
pub mod encode;
pub mod input;
pub mod render;
pub mod scale;
