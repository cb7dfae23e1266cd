// Leak report in JSON format; stdout carries nothing but the report line.

#[global_allocator]
static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let guard = leaktrail::GuardBuilder::new("json_report")
        .log_path(test_leaks::sink_path("json_report"))
        .format(leaktrail::Format::Json)
        .build()?;

    let addr = test_leaks::leak_bytes(128);
    std::hint::black_box(addr);

    drop(guard);
    Ok(())
}
