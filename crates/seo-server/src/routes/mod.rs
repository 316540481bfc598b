pub mod parse_invoice;
