#[cfg(test)]
mod pricing_service;
