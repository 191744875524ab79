// Reusable UI components shared by the views

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;
