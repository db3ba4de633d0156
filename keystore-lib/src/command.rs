//! Host bridge commands.
//!
//! Hosts call in with a plugin action name and a JSON argument array.
//! [`KeystoreCommand::parse`] turns that into a typed command and
//! [`KeystoreCommand::execute`] runs it against a [`KeyRegistry`],
//! producing the JSON value handed back to the host.
//!
//! | action         | args                                        | result                 |
//! |----------------|---------------------------------------------|------------------------|
//! | `getPublicKey` | `[]`                                        | `{"pubKey"}`           |
//! | `signEvent`    | `[event]`                                   | signed event           |
//! | `listKeys`     | `[]`                                        | key index              |
//! | `addKey`       | `[{"name", "privateKey"}]`                  | `{"pubKey"}`           |
//! | `selectKey`    | `[{"publicKey"}]`                           | key index              |
//! | `editKey`      | `[{"publicKey", "name"}]`                   | key index              |
//! | `showKey`      | `[{"publicKey"}]`                           | `{"privateKey"}`       |
//! | `deleteKey`    | `[{"publicKey"}]`                           | key index              |
//! | `encrypt`      | `[{"publicKey", "plaintext"}]`              | `{"result"}`           |
//! | `decrypt`      | `[{"publicKey", "ciphertext"}]`             | `{"result"}`           |

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::errors::KeystoreError;
use crate::event::EventTemplate;
use crate::registry::KeyRegistry;
use crate::secure_storage::SecureStorage;
use crate::Result;

/// A parsed host request.
pub enum KeystoreCommand {
    GetPublicKey,
    SignEvent(EventTemplate),
    ListKeys,
    AddKey {
        name: String,
        private_key: Zeroizing<String>,
    },
    SelectKey {
        public_key: String,
    },
    EditKey {
        public_key: String,
        name: String,
    },
    ShowKey {
        public_key: String,
    },
    DeleteKey {
        public_key: String,
    },
    Encrypt {
        public_key: String,
        plaintext: Zeroizing<String>,
    },
    Decrypt {
        public_key: String,
        ciphertext: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddKeyArgs {
    name: String,
    private_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyArgs {
    public_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditKeyArgs {
    public_key: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptArgs {
    public_key: String,
    plaintext: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptArgs {
    public_key: String,
    ciphertext: String,
}

impl KeystoreCommand {
    /// Parse an action name and its JSON argument array.
    pub fn parse(action: &str, args_json: &str) -> Result<Self> {
        let args = if args_json.trim().is_empty() {
            Value::Array(Vec::new())
        } else {
            serde_json::from_str(args_json)?
        };
        Self::from_value(action, args)
    }

    pub fn from_value(action: &str, args: Value) -> Result<Self> {
        let command = match action {
            "getPublicKey" => Self::GetPublicKey,
            "listKeys" => Self::ListKeys,
            "signEvent" => Self::SignEvent(EventTemplate::from_value(first_arg(action, args)?)?),
            "addKey" => {
                let AddKeyArgs { name, private_key } = typed_arg(action, args)?;
                Self::AddKey {
                    name,
                    private_key: Zeroizing::new(private_key),
                }
            }
            "selectKey" => Self::SelectKey {
                public_key: typed_arg::<KeyArgs>(action, args)?.public_key,
            },
            "editKey" => {
                let EditKeyArgs { public_key, name } = typed_arg(action, args)?;
                Self::EditKey { public_key, name }
            }
            "showKey" => Self::ShowKey {
                public_key: typed_arg::<KeyArgs>(action, args)?.public_key,
            },
            "deleteKey" => Self::DeleteKey {
                public_key: typed_arg::<KeyArgs>(action, args)?.public_key,
            },
            "encrypt" => {
                let EncryptArgs {
                    public_key,
                    plaintext,
                } = typed_arg(action, args)?;
                Self::Encrypt {
                    public_key,
                    plaintext: Zeroizing::new(plaintext),
                }
            }
            "decrypt" => {
                let DecryptArgs {
                    public_key,
                    ciphertext,
                } = typed_arg(action, args)?;
                Self::Decrypt {
                    public_key,
                    ciphertext,
                }
            }
            other => {
                return Err(KeystoreError::invalid_data(
                    "action",
                    format!("unknown action {}", other),
                ))
            }
        };
        Ok(command)
    }

    /// Plugin action name of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetPublicKey => "getPublicKey",
            Self::SignEvent(_) => "signEvent",
            Self::ListKeys => "listKeys",
            Self::AddKey { .. } => "addKey",
            Self::SelectKey { .. } => "selectKey",
            Self::EditKey { .. } => "editKey",
            Self::ShowKey { .. } => "showKey",
            Self::DeleteKey { .. } => "deleteKey",
            Self::Encrypt { .. } => "encrypt",
            Self::Decrypt { .. } => "decrypt",
        }
    }

    /// Run against `registry` and build the host response.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, registry), fields(action = self.action())))]
    pub fn execute<S: SecureStorage>(self, registry: &KeyRegistry<S>) -> Result<Value> {
        match self {
            Self::GetPublicKey => Ok(pub_key_response(&registry.current_public_key()?.to_hex())),
            Self::SignEvent(template) => registry.sign_event(template)?.to_value(),
            Self::ListKeys => registry.list_keys()?.to_value(),
            Self::AddKey { name, private_key } => {
                let public_key = registry.add_key(&name, &private_key)?;
                Ok(pub_key_response(&public_key.to_hex()))
            }
            Self::SelectKey { public_key } => registry.select_key(&public_key)?.to_value(),
            Self::EditKey { public_key, name } => {
                registry.edit_key(&public_key, &name)?.to_value()
            }
            Self::ShowKey { public_key } => {
                let nsec = registry.show_key(&public_key)?;
                Ok(json!({ "privateKey": nsec.as_str() }))
            }
            Self::DeleteKey { public_key } => registry.delete_key(&public_key)?.to_value(),
            Self::Encrypt {
                public_key,
                plaintext,
            } => Ok(json!({ "result": registry.encrypt(&public_key, &plaintext)? })),
            Self::Decrypt {
                public_key,
                ciphertext,
            } => Ok(json!({ "result": registry.decrypt(&public_key, &ciphertext)? })),
        }
    }
}

impl fmt::Debug for KeystoreCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // arguments may carry secrets or plaintext
        f.debug_struct("KeystoreCommand")
            .field("action", &self.action())
            .finish_non_exhaustive()
    }
}

/// Parse and execute in one step, returning the response as JSON text.
pub fn dispatch<S: SecureStorage>(
    registry: &KeyRegistry<S>,
    action: &str,
    args_json: &str,
) -> Result<String> {
    let response = KeystoreCommand::parse(action, args_json)?.execute(registry)?;
    Ok(serde_json::to_string(&response)?)
}

fn pub_key_response(public_key_hex: &str) -> Value {
    json!({ "pubKey": public_key_hex })
}

fn first_arg(action: &str, args: Value) -> Result<Value> {
    match args {
        Value::Array(items) => items.into_iter().next().ok_or_else(|| {
            KeystoreError::invalid_data("args", format!("{} expects one argument", action))
        }),
        Value::Object(_) => Ok(args),
        _ => Err(KeystoreError::invalid_data(
            "args",
            "expected a JSON array of arguments",
        )),
    }
}

fn typed_arg<T: DeserializeOwned>(action: &str, args: Value) -> Result<T> {
    let arg = first_arg(action, args)?;
    serde_json::from_value(arg)
        .map_err(|e| KeystoreError::invalid_data("args", format!("{}: {}", action, e)))
}
