pub mod source_selector;
