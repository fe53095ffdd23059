use crate::types::Subject;

/// Breeds the blog writes about, in publishing order.
pub const DOG_BREEDS: &[&str] = &[
    "Affenpinscher",
    "Afghan Hound",
    "Airedale Terrier",
    "Akita",
    "Alaskan Malamute",
    "American Staffordshire Terrier",
    "Australian Cattle Dog",
    "Australian Shepherd",
    "Basenji",
    "Basset Hound",
    "Beagle",
    "Bernese Mountain Dog",
    "Bichon Frise",
    "Bloodhound",
    "Border Collie",
    "Boston Terrier",
    "Boxer",
    "Brittany",
    "Bulldog",
    "Bull Terrier",
    "Cavalier King Charles Spaniel",
    "Chihuahua",
    "Chow Chow",
    "Cocker Spaniel",
    "Dachshund",
    "Dalmatian",
    "Doberman Pinscher",
    "English Springer Spaniel",
    "French Bulldog",
    "German Shepherd",
    "German Shorthaired Pointer",
    "Golden Retriever",
    "Great Dane",
    "Greyhound",
    "Havanese",
    "Irish Setter",
    "Jack Russell Terrier",
    "Labrador Retriever",
    "Maltese",
    "Miniature Schnauzer",
    "Newfoundland",
    "Papillon",
    "Pembroke Welsh Corgi",
    "Pomeranian",
    "Poodle",
    "Pug",
    "Rhodesian Ridgeback",
    "Rottweiler",
    "Saint Bernard",
    "Samoyed",
    "Shetland Sheepdog",
    "Shiba Inu",
    "Shih Tzu",
    "Siberian Husky",
    "Vizsla",
    "Weimaraner",
    "West Highland White Terrier",
    "Whippet",
    "Yorkshire Terrier",
];

#[derive(Debug, Clone, Default)]
pub struct Worklist {
    subjects: Vec<Subject>,
}

impl Worklist {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn dog_breeds() -> Self {
        DOG_BREEDS.iter().map(|&name| Subject::new(name)).collect()
    }

    /// Keep only the first `limit` subjects; `None` keeps them all.
    pub fn truncated(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            self.subjects.truncate(limit);
        }
        self
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

impl FromIterator<Subject> for Worklist {
    fn from_iter<I: IntoIterator<Item = Subject>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
