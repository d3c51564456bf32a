//! Presentation seams of the widget.

use super::{Field, FieldError};

/// The modal form.
pub trait FormView {
    fn show_modal(&mut self);

    fn hide_modal(&mut self);

    /// Show `error` under `field` and mark the field invalid.
    fn show_field_error(&mut self, field: Field, error: FieldError);

    /// Remove the message and the invalid marker of `field`.
    fn clear_field_error(&mut self, field: Field);

    /// Remove the message of `field`, keeping its marker.
    fn clear_field_message(&mut self, field: Field);

    /// Empty both inputs and clear every message and marker.
    fn reset_form(&mut self);

    fn show_success(&mut self);

    fn hide_success(&mut self);
}

/// Leaves the page for the members area.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}
