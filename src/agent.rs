use anyhow::Result;

use crate::llm::LlmClient;

/// Capability interface for LLM-backed agents: a name plus one generic
/// operation that frames a task prompt around it.
#[allow(async_fn_in_trait)]
pub trait Agent {
    fn name(&self) -> &'static str;
    fn llm(&self) -> &LlmClient;

    async fn act(&self, task: &str) -> Result<String> {
        let prompt = format!(
            "You are {}. Perform the task below.\nTask: {task}",
            self.name()
        );
        self.llm().generate(&prompt).await
    }
}

/// Turns a run of recognized sign words into one grammatically corrected
/// sentence, instructing the model not to invent content.
pub struct SentenceGeneratorAgent {
    llm: LlmClient,
}

impl SentenceGeneratorAgent {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, words: &str) -> Result<String> {
        let prompt = format!(
            "You are an expert word to context generator assistant thats being used to \
convert words said by deaf people to sentence, dont try to generate sentence out of \
nowhere, just use the words as it is and make the sentence a bit better grammatically. \
Parse the following words and extract context and return the sentence in a line without \
changing the meaning of the provided word\n\
words are: {words}\n\
Return only a single string, dont write any note or anything, just plane result"
        );
        self.llm.generate(&prompt).await
    }
}

impl Agent for SentenceGeneratorAgent {
    fn name(&self) -> &'static str {
        "Sentence_Generator"
    }

    fn llm(&self) -> &LlmClient {
        &self.llm
    }
}
