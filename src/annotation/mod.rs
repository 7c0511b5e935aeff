pub(crate) mod marker;
