//! Login form example - querying, typing, pressing and waiting

use std::time::Duration;

use host::{handler, HostNode, HostTree, NodeKind};
use serde_json::{json, Value};
use testing::{QueryOptions, RoleQuery, Screen, WaitForOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let tree = HostTree::from_json(&json!({
        "type": "View",
        "props": { "testID": "login" },
        "children": [
            { "type": "Text", "props": { "nativeID": "user-label" }, "children": ["Username"] },
            { "type": "TextInput", "props": { "aria-labelledby": "user-label", "placeholder": "jane.doe" } },
            { "type": "Pressable", "props": { "role": "button" },
              "children": [{ "type": "Text", "children": ["Sign in"] }] }
        ]
    }))?;
    let screen = Screen::new(tree);
    let options = QueryOptions::default();

    let username = screen.get_by_label_text("Username", &options)?;
    screen.change_text(username, "ada");
    println!("⌨️  Typed: {:?}", screen.display_value(username));

    // Pressing "Sign in" renders a greeting a little later
    let sign_in = screen.get_by_role(RoleQuery::new("button").name("Sign in"), &options)?;
    let tree = screen.tree();
    let greeting_screen = screen.clone();
    screen.write().set_handler(
        sign_in,
        "onPress",
        handler(move |_| {
            let tree = tree.clone();
            let name = greeting_screen.display_value(username).unwrap_or_default();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(120)).await;
                let mut tree = tree.write().unwrap_or_else(std::sync::PoisonError::into_inner);
                if let Some(root) = tree.root_id() {
                    if let Ok(text) = tree.append_child(root, HostNode::new(NodeKind::Text)) {
                        let _ = tree.append_child(text, HostNode::raw_text(format!("Welcome, {name}!")));
                    }
                }
            });
            Value::Bool(true)
        }),
    )?;

    let accepted = screen.press(sign_in, None);
    println!("👆 Pressed sign in, handler returned {:?}", accepted);

    let welcome = screen
        .find_by_text("Welcome, ada!", &options, &WaitForOptions::default())
        .await?;
    println!("✅ Found greeting: {}", screen.text_content(welcome)?);

    Ok(())
}
