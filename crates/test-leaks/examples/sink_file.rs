// Console mirroring disabled: the report lands only in the sink file, which
// this binary reads back and verifies itself.

#[global_allocator]
static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = test_leaks::sink_path("sink_file");

    let guard = leaktrail::GuardBuilder::new("sink_file")
        .log_path(&path)
        .log_all(true)
        .console(leaktrail::ConsoleMode::Disabled)
        .build()?;

    let addr = test_leaks::leak_bytes(256);
    std::hint::black_box(addr);

    drop(guard);

    let contents = std::fs::read_to_string(&path)?;
    assert!(contents.contains("==ALLOCATION=="), "sink missing event log");
    assert!(
        contents.contains("[ERROR] - Dangling pointer at memory address:"),
        "sink missing leak report"
    );
    assert!(contents.contains("[ERROR] - Memory leak size: 256 bytes"));
    std::fs::remove_file(&path)?;

    println!("SINK OK");
    Ok(())
}
