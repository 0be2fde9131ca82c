//! Example that demonstrates parsing, compiling and emitting semaphore operands.

use semspec::{OperationFlags, OperationPlan, emit, plan_set_all};

fn main() {
    println!("=== semspec README Example ===");

    // Decrement semaphores 0 and 1 with undo, then increment semaphore 2.
    let plan = OperationPlan::parse(&["0,1=-1u", "2=1"])
        .unwrap()
        .with_flags(OperationFlags::new(true, false));

    let operations = plan.compile(|| Ok::<_, semspec::Error>(3)).unwrap();

    for operation in &operations {
        println!(
            "semaphore {} += {} ({:?})",
            operation.semaphore_number(),
            operation.magnitude(),
            operation.flags()
        );
    }

    println!("As operands: {}", emit(&operations));

    let values = plan_set_all(&["0:1=5", "2=7"], 3).unwrap();
    println!("Initial values: {values:?}");

    println!("README example completed successfully!");
}
