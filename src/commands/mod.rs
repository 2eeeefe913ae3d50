/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    — Interactive chat session
- `history` — List and delete stored conversations
- `export`  — Write an artifact from a stored conversation to a file

These handlers are intentionally small and use the library components:
the session, the store, the providers, and the exporter.
*/

pub mod chat;
pub mod export;
pub mod history;
pub mod special_commands;
