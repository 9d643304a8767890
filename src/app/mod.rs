// Application layer: drives the controller against a page without a browser.

pub mod driver;
