pub mod lead;
pub mod whatsapp;
