mod fake;

mod connectivity;
mod report;
