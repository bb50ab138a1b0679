//! Domain entities for inputhook.
//!
//! Everything in this module is pure state and arithmetic: no OS calls, no
//! threads, no I/O. The capture side feeds raw input through these types to
//! produce [`event::Event`] values; the posting side uses
//! [`coordinates::normalize_coordinates`] to turn events back into native
//! input.

/// The canonical event value delivered to consumers.
pub mod event;

/// Modifier mask bits and the tracker that maintains them.
pub mod modifiers;

/// Multi-click counting and click/drag classification.
pub mod clicks;

/// Virtual-desktop coordinate normalization for absolute pointer motion.
pub mod coordinates;
